use gradewarrior::calc::weighted_average;
use gradewarrior::models::Assignment;

fn graded(grade: f64, weight: f64) -> Assignment {
    Assignment {
        id: format!("{}-{}", grade, weight),
        name: "graded".to_string(),
        grade,
        weight,
        is_theoretical: false,
    }
}

#[test]
fn test_empty_list_is_zero() {
    let empty: Vec<Assignment> = Vec::new();
    assert_eq!(weighted_average(&empty), 0.0);
}

#[test]
fn test_zero_total_weight_is_zero() {
    let list = vec![graded(90.0, 0.0), graded(40.0, 0.0)];
    assert_eq!(weighted_average(&list), 0.0);
}

#[test]
fn test_equal_weights() {
    let list = vec![graded(80.0, 50.0), graded(90.0, 50.0)];
    assert_eq!(weighted_average(&list), 85.0);
}

#[test]
fn test_uneven_weights() {
    let list = vec![graded(100.0, 30.0), graded(0.0, 70.0)];
    assert_eq!(weighted_average(&list), 30.0);
}

#[test]
fn test_repeated_weights_each_count() {
    // Summing distinct weights only would give 60 / 20 = 3.0 here.
    let list = vec![graded(60.0, 10.0), graded(60.0, 10.0), graded(90.0, 20.0)];
    assert_eq!(weighted_average(&list), 75.0);
}

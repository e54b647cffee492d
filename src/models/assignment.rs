use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub name: String,
    pub grade: f64,
    pub weight: f64,
    #[serde(default)]
    pub is_theoretical: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignmentRequest {
    pub name: String,
    pub grade: f64,
    pub weight: f64,
    #[serde(default)]
    pub is_theoretical: bool,
}

/// Payload of a queued assignment update. Carries every editable field so a
/// newer queued update never drops an earlier field edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentInput {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_theoretical: Option<bool>,
}

impl UpdateAssignmentInput {
    pub fn from_assignment(assignment: &Assignment) -> Self {
        Self {
            id: assignment.id.clone(),
            name: Some(assignment.name.clone()),
            grade: Some(assignment.grade),
            weight: Some(assignment.weight),
            is_theoretical: Some(assignment.is_theoretical),
        }
    }

    /// Overwrites the fields this input sets. The theoretical flag is left
    /// alone; ledger membership is the owning course's concern.
    pub fn apply_to(&self, assignment: &mut Assignment) {
        if let Some(name) = &self.name {
            assignment.name = name.clone();
        }
        if let Some(grade) = self.grade {
            assignment.grade = grade;
        }
        if let Some(weight) = self.weight {
            assignment.weight = weight;
        }
    }
}

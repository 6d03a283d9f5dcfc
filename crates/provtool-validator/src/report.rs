/// One row of a chain-validation report (§4.5).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportEntry {
    pub entity: String,
    pub data: String,
    pub name: String,
    pub valid: bool,
    pub used_by: Vec<String>,
    pub activity: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub used: Vec<String>,
}

impl ReportEntry {
    pub(crate) fn unreadable(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            data: String::new(),
            name: String::new(),
            valid: false,
            used_by: Vec::new(),
            activity: String::new(),
            start_time: String::new(),
            end_time: None,
            used: Vec::new(),
        }
    }
}

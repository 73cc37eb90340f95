use serde::{Deserialize, Serialize};

use super::models::{Outcome, ScoreSheet};

/// Request payload for starting a new offline sheet
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSheetRequest {
    pub names: Vec<String>,
    /// Falls back to the configured default when omitted
    pub winning_score: Option<i32>,
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallsRequest {
    pub calls: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MadeRequest {
    pub made: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub struct OutcomesRequest {
    pub outcomes: Vec<Outcome>,
}

/// A sheet plus the names of its winners once it has finished
#[derive(Debug, Serialize, Deserialize)]
pub struct SheetResponse {
    #[serde(flatten)]
    pub sheet: ScoreSheet,
    #[serde(default)]
    pub winners: Vec<String>,
}

impl From<ScoreSheet> for SheetResponse {
    fn from(sheet: ScoreSheet) -> Self {
        let winners = if sheet.is_finished() {
            sheet.leaders().into_iter().map(|p| p.name.clone()).collect()
        } else {
            Vec::new()
        };
        Self { sheet, winners }
    }
}

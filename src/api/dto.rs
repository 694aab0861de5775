use crate::application::RunReport;
use crate::domain::ast::Position;
use crate::domain::stats::{Kind, Stats};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportDto {
    pub files: usize,
    pub rewritten: Vec<String>,
    pub buckets: Vec<BucketDto>,
    pub errors: Vec<ErrorDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BucketDto {
    pub name: String,
    pub description: String,
    pub count: usize,
    pub parent: String,
    pub percent: f64,
    /// Only filled in when positions are listed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positions: Vec<PositionDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDto {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDto {
    pub path: String,
    pub message: String,
}

impl From<&Position> for PositionDto {
    fn from(pos: &Position) -> Self {
        PositionDto {
            file: pos.file.clone(),
            line: pos.line,
            column: pos.column,
        }
    }
}

impl BucketDto {
    fn new(stats: &Stats, kind: Kind, listing: bool) -> Self {
        let positions = if listing {
            stats.positions(kind).iter().map(PositionDto::from).collect()
        } else {
            Vec::new()
        };
        BucketDto {
            name: kind.name().to_string(),
            description: kind.description().to_string(),
            count: stats.get(kind),
            parent: kind.parent().name().to_string(),
            percent: stats.percent(kind),
            positions,
        }
    }
}

impl ReportDto {
    pub fn new(report: &RunReport, listing: bool) -> Self {
        ReportDto {
            files: report.files,
            rewritten: report
                .rewritten
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            buckets: Kind::ALL
                .into_iter()
                .map(|kind| BucketDto::new(&report.stats, kind, listing))
                .collect(),
            errors: report
                .errors
                .iter()
                .map(|e| ErrorDto {
                    path: e.path.display().to_string(),
                    message: format!("{:#}", e.error),
                })
                .collect(),
        }
    }
}

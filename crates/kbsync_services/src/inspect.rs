use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use kbsync_domain::{Infrastructure, StoredPoint, VectorStore, VectorStoreError, INSTRUCTIONS_COLLECTION};
use tracing::debug;

const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultInstruction {
    pub instruction_id: String,
    pub instruction: String,
}

/// All points indexed for one question-scoped instruction. Each point holds
/// one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionGroup {
    pub instruction_id: String,
    pub instruction: String,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInstructions {
    pub project_id: String,
    pub points: usize,
    pub defaults: Vec<DefaultInstruction>,
    pub question_groups: Vec<QuestionGroup>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstructionStats {
    pub default_points: usize,
    pub question_points: usize,
    pub unique_instruction_ids: usize,
    pub projects: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedInstruction {
    pub instruction_id: String,
    pub points: usize,
}

impl ExpectedInstruction {
    pub fn found(&self) -> bool {
        self.points > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionReport {
    pub total_points: usize,
    pub projects: Vec<ProjectInstructions>,
    pub stats: InstructionStats,
    pub expected: Vec<ExpectedInstruction>,
}

impl InstructionReport {
    /// Builds the report from raw points. Projects and instruction groups keep
    /// the order in which they first appear.
    pub fn from_points(points: &[StoredPoint], expected: &[String]) -> Self {
        let mut by_project: IndexMap<String, Vec<&StoredPoint>> = IndexMap::new();
        for point in points {
            let project_id = point.text("project_id").unwrap_or_else(|| UNKNOWN.to_string());
            by_project.entry(project_id).or_default().push(point);
        }

        let projects: Vec<ProjectInstructions> = by_project
            .into_iter()
            .map(|(project_id, points)| project_instructions(project_id, &points))
            .collect();

        let default_points = points.iter().filter(|point| point.flag("is_default")).count();
        let unique_instruction_ids = points
            .iter()
            .map(|point| point.text("instruction_id").unwrap_or_default())
            .collect::<HashSet<_>>()
            .len();

        let expected = expected
            .iter()
            .map(|id| ExpectedInstruction {
                instruction_id: id.clone(),
                points: points
                    .iter()
                    .filter(|point| point.text("instruction_id").as_deref() == Some(id.as_str()))
                    .count(),
            })
            .collect();

        Self {
            total_points: points.len(),
            stats: InstructionStats {
                default_points,
                question_points: points.len() - default_points,
                unique_instruction_ids,
                projects: projects.len(),
            },
            projects,
            expected,
        }
    }

    pub fn missing(&self) -> Vec<&str> {
        self.expected
            .iter()
            .filter(|expected| !expected.found())
            .map(|expected| expected.instruction_id.as_str())
            .collect()
    }
}

fn project_instructions(project_id: String, points: &[&StoredPoint]) -> ProjectInstructions {
    let mut defaults = Vec::new();
    let mut groups: IndexMap<String, QuestionGroup> = IndexMap::new();

    for point in points {
        let instruction_id = point.text("instruction_id").unwrap_or_else(|| UNKNOWN.to_string());
        let instruction = point.text("instruction").unwrap_or_default();
        if point.flag("is_default") {
            defaults.push(DefaultInstruction { instruction_id, instruction });
            continue;
        }
        let group = groups.entry(instruction_id.clone()).or_insert_with(|| QuestionGroup {
            instruction_id,
            instruction,
            questions: Vec::new(),
        });
        group.questions.push(point.text("content").unwrap_or_default());
    }

    ProjectInstructions {
        project_id,
        points: points.len(),
        defaults,
        question_groups: groups.into_values().collect(),
    }
}

/// Reads back what the indexer stored for instructions.
pub struct KbInspector<F> {
    infra: Arc<F>,
}

impl<F: Infrastructure> KbInspector<F> {
    pub fn new(infra: Arc<F>) -> Self {
        Self { infra }
    }

    pub async fn instructions(
        &self,
        expected: &[String],
    ) -> Result<InstructionReport, VectorStoreError> {
        let points = self.infra.vector_store().scroll(INSTRUCTIONS_COLLECTION).await?;
        debug!(points = points.len(), "Loaded instruction points");
        Ok(InstructionReport::from_points(&points, expected))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::test_utils::TestInfra;

    fn default_point(id: &str, project: i64, instruction_id: &str) -> StoredPoint {
        StoredPoint::new(id)
            .with("project_id", json!(project))
            .with("instruction_id", json!(instruction_id))
            .with("instruction", json!("Comment every CTE"))
            .with("is_default", json!(true))
    }

    fn question_point(id: &str, project: i64, instruction_id: &str, question: &str) -> StoredPoint {
        StoredPoint::new(id)
            .with("project_id", json!(project))
            .with("instruction_id", json!(instruction_id))
            .with("instruction", json!("Teachers own classes"))
            .with("is_default", json!(false))
            .with("content", json!(question))
    }

    fn points() -> Vec<StoredPoint> {
        vec![
            default_point("1", 20, "cte_comment_global"),
            question_point("2", 20, "teacher_student_relation", "Who teaches Ann?"),
            question_point("3", 20, "teacher_student_relation", "Class of Bob?"),
            question_point("4", 21, "date_format_rules", "Orders last week"),
        ]
    }

    #[test]
    fn test_groups_by_project_and_instruction() {
        let actual = InstructionReport::from_points(&points(), &[]);

        assert_eq!(actual.total_points, 4);
        assert_eq!(actual.projects.len(), 2);
        let first = &actual.projects[0];
        assert_eq!(first.project_id, "20");
        assert_eq!(first.points, 3);
        assert_eq!(
            first.defaults,
            vec![DefaultInstruction {
                instruction_id: "cte_comment_global".to_string(),
                instruction: "Comment every CTE".to_string()
            }]
        );
        assert_eq!(
            first.question_groups,
            vec![QuestionGroup {
                instruction_id: "teacher_student_relation".to_string(),
                instruction: "Teachers own classes".to_string(),
                questions: vec!["Who teaches Ann?".to_string(), "Class of Bob?".to_string()],
            }]
        );
        assert_eq!(
            actual.stats,
            InstructionStats {
                default_points: 1,
                question_points: 3,
                unique_instruction_ids: 3,
                projects: 2
            }
        );
    }

    #[test]
    fn test_missing_project_is_unknown() {
        let point = StoredPoint::new("9").with("instruction_id", json!("orphan"));
        let actual = InstructionReport::from_points(&[point], &[]);
        assert_eq!(actual.projects[0].project_id, "unknown");
    }

    #[test]
    fn test_expected_ids() {
        let expected = vec!["teacher_student_relation".to_string(), "sql_best_practices".to_string()];
        let actual = InstructionReport::from_points(&points(), &expected);

        assert_eq!(actual.expected[0].points, 2);
        assert_eq!(actual.missing(), vec!["sql_best_practices"]);
    }

    #[tokio::test]
    async fn test_inspector_reads_instruction_collection() {
        let server = mockito::Server::new_async().await;
        let infra = TestInfra::new(&server).points(INSTRUCTIONS_COLLECTION, points());

        let actual = KbInspector::new(Arc::new(infra)).instructions(&[]).await.unwrap();
        assert_eq!(actual.stats.projects, 2);
    }

    #[tokio::test]
    async fn test_inspector_surfaces_store_errors() {
        let server = mockito::Server::new_async().await;
        let infra = TestInfra::new(&server).vector_store_down();

        let actual = KbInspector::new(Arc::new(infra)).instructions(&[]).await;
        assert!(actual.is_err());
    }
}

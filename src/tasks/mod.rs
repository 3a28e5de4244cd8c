mod builder;
mod forest;
mod task;

pub use builder::{create_tasks_from_tickets, parse_date};
pub use forest::{NodeRef, TaskForest};
pub use task::{Task, TaskId};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Fields;
    use crate::error::{GanttError, ParseError};
    use crate::jira::Ticket;
    use chrono::NaiveDate;
    use serde_json::json;

    const START: &str = "customfield_100";
    const END: &str = "customfield_101";
    const PROGRESS: &str = "customfield_102";
    const BLOCKED_BY: &str = "is blocked by";

    fn fields() -> Fields {
        Fields {
            start_date: START.to_string(),
            end_date: END.to_string(),
            progress: Some(PROGRESS.to_string()),
            link: BLOCKED_BY.to_string(),
        }
    }

    fn ticket(key: &str, start: &str, end: &str) -> Ticket {
        Ticket::new(key)
            .with_summary(&format!("Summary of {}", key))
            .with_field(START, json!(start))
            .with_field(END, json!(end))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn keys(forest: &TaskForest) -> Vec<String> {
        forest
            .to_pre_order_list()
            .iter()
            .map(|t| t.key.clone())
            .collect()
    }

    #[test]
    fn test_parent_child_from_sorted_tickets() {
        let tickets = vec![
            ticket("B", "2024-01-02", "2024-01-10").with_parent("A"),
            ticket("A", "2024-01-01", "2024-01-05"),
        ];
        let forest = create_tasks_from_tickets(&tickets, &fields()).unwrap();

        assert_eq!(forest.len(), 2);
        assert_eq!(forest.roots().len(), 1);

        let a = forest.find_task_by_key("A").unwrap();
        let b = forest.find_task_by_key("B").unwrap();
        assert_eq!(forest.roots(), &[a]);
        assert_eq!(forest.children_of(NodeRef::Task(a)), &[b]);
        assert_eq!(forest.get(b).unwrap().parent(), NodeRef::Task(a));

        let task_a = forest.get(a).unwrap();
        assert_eq!(task_a.summary, "Summary of A");
        assert_eq!(task_a.start_date, date(2024, 1, 1));
        assert_eq!(task_a.end_date, date(2024, 1, 5));
    }

    #[test]
    fn test_tickets_without_dates_are_dropped() {
        let tickets = vec![
            ticket("A", "2024-01-01", "2024-01-05"),
            Ticket::new("NO-START").with_field(END, json!("2024-01-05")),
            Ticket::new("NO-END").with_field(START, json!("2024-01-05")),
            Ticket::new("NULL-END")
                .with_field(START, json!("2024-01-05"))
                .with_field(END, json!(null)),
        ];
        let forest = create_tasks_from_tickets(&tickets, &fields()).unwrap();

        assert_eq!(keys(&forest), vec!["A"]);
    }

    #[test]
    fn test_empty_batch_is_valid() {
        let forest = create_tasks_from_tickets(&[], &fields()).unwrap();
        assert!(forest.is_empty());
        assert!(forest.to_pre_order_list().is_empty());
    }

    #[test]
    fn test_sorted_by_start_end_then_key() {
        let tickets = vec![
            ticket("C", "2024-01-01", "2024-01-09"),
            ticket("B", "2024-01-01", "2024-01-03"),
            ticket("A", "2024-01-01", "2024-01-03"),
            ticket("D", "2023-12-31", "2024-02-01"),
        ];
        let forest = create_tasks_from_tickets(&tickets, &fields()).unwrap();

        assert_eq!(keys(&forest), vec!["D", "A", "B", "C"]);
    }

    #[test]
    fn test_forward_parent_reference_goes_to_root() {
        // A 声明父任务 P，但 P 开始更晚
        let tickets = vec![
            ticket("A", "2024-01-01", "2024-01-05").with_parent("P"),
            ticket("P", "2024-01-03", "2024-01-20"),
        ];
        let forest = create_tasks_from_tickets(&tickets, &fields()).unwrap();

        let a = forest.task_by_key("A").unwrap();
        assert_eq!(a.parent(), NodeRef::Root);
        assert_eq!(forest.roots().len(), 2);
        assert!(forest.task_by_key("P").unwrap().children().is_empty());
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let tickets = vec![ticket("A", "2024-01-01", "2024-01-05").with_parent("GONE-1")];
        let forest = create_tasks_from_tickets(&tickets, &fields()).unwrap();

        assert_eq!(forest.task_by_key("A").unwrap().parent(), NodeRef::Root);
    }

    #[test]
    fn test_children_attached_from_declaring_ticket() {
        // 子任务先开始，父任务通过 subtasks 把它们收养
        let tickets = vec![
            ticket("C1", "2024-01-01", "2024-01-02"),
            ticket("C2", "2024-01-02", "2024-01-03"),
            ticket("P", "2024-01-03", "2024-01-10").with_subtasks(&["C2", "C1", "LATER", "GONE"]),
            ticket("LATER", "2024-02-01", "2024-02-02"),
        ];
        let forest = create_tasks_from_tickets(&tickets, &fields()).unwrap();

        let p = forest.find_task_by_key("P").unwrap();
        let c1 = forest.find_task_by_key("C1").unwrap();
        let c2 = forest.find_task_by_key("C2").unwrap();
        assert_eq!(forest.children_of(NodeRef::Task(p)), &[c2, c1]);
        assert_eq!(forest.get(c1).unwrap().parent(), NodeRef::Task(p));
        assert_eq!(
            forest.task_by_key("LATER").unwrap().parent(),
            NodeRef::Root
        );
        assert_eq!(keys(&forest), vec!["P", "C2", "C1", "LATER"]);
    }

    #[test]
    fn test_child_that_would_create_loop_is_ignored() {
        // B 的父任务是 A；A 之后的 C 把 A 声明为子任务没问题，
        // 但 B 不能再把 A 收为子任务
        let tickets = vec![
            ticket("A", "2024-01-01", "2024-01-02"),
            ticket("B", "2024-01-02", "2024-01-03")
                .with_parent("A")
                .with_subtasks(&["A"]),
        ];
        let forest = create_tasks_from_tickets(&tickets, &fields()).unwrap();

        let a = forest.find_task_by_key("A").unwrap();
        let b = forest.find_task_by_key("B").unwrap();
        assert_eq!(forest.roots(), &[a]);
        assert_eq!(forest.get(b).unwrap().parent(), NodeRef::Task(a));
        assert!(forest.get(b).unwrap().children().is_empty());
    }

    #[test]
    fn test_duplicate_ticket_keeps_first() {
        let tickets = vec![
            ticket("A", "2024-01-01", "2024-01-02"),
            ticket("A", "2024-03-01", "2024-03-02"),
        ];
        let forest = create_tasks_from_tickets(&tickets, &fields()).unwrap();

        assert_eq!(forest.len(), 1);
        assert_eq!(
            forest.task_by_key("A").unwrap().start_date,
            date(2024, 1, 1)
        );
    }

    #[test]
    fn test_blocking_links_only_within_batch() {
        let tickets = vec![
            ticket("A", "2024-01-01", "2024-01-02"),
            ticket("B", "2024-01-03", "2024-01-04")
                .with_inward_link(BLOCKED_BY, "A")
                .with_inward_link(BLOCKED_BY, "OUTSIDE-1")
                .with_inward_link(BLOCKED_BY, "UNDATED")
                .with_inward_link("relates to", "A"),
            // 排在后面的阻塞者同样有效
            ticket("C", "2024-01-01", "2024-01-02").with_inward_link(BLOCKED_BY, "B"),
            Ticket::new("UNDATED"),
        ];
        let forest = create_tasks_from_tickets(&tickets, &fields()).unwrap();

        assert_eq!(forest.task_by_key("B").unwrap().blocking_tasks, vec!["A"]);
        assert_eq!(forest.task_by_key("C").unwrap().blocking_tasks, vec!["B"]);
        for task in forest.iter() {
            for key in &task.blocking_tasks {
                assert!(forest.task_by_key(key).is_some());
            }
        }
    }

    #[test]
    fn test_progress_values() {
        let tickets = vec![
            ticket("A", "2024-01-01", "2024-01-02"),
            ticket("B", "2024-01-01", "2024-01-03").with_field(PROGRESS, json!(40)),
            ticket("C", "2024-01-01", "2024-01-04").with_field(PROGRESS, json!("62.5")),
            ticket("D", "2024-01-01", "2024-01-05").with_field(PROGRESS, json!("n/a")),
            ticket("E", "2024-01-01", "2024-01-06").with_field(PROGRESS, json!(null)),
            ticket("F", "2024-01-01", "2024-01-07").with_field(PROGRESS, json!("NaN")),
        ];
        let forest = create_tasks_from_tickets(&tickets, &fields()).unwrap();

        let progress = |key: &str| forest.task_by_key(key).unwrap().progress_in_percent;
        assert_eq!(progress("A"), 0.0);
        assert_eq!(progress("B"), 40.0);
        assert_eq!(progress("C"), 62.5);
        assert_eq!(progress("D"), 0.0);
        assert_eq!(progress("E"), 0.0);
        assert_eq!(progress("F"), 0.0);
    }

    #[test]
    fn test_progress_without_binding() {
        let mut fields = fields();
        fields.progress = None;
        let tickets = vec![ticket("A", "2024-01-01", "2024-01-02").with_field(PROGRESS, json!(90))];
        let forest = create_tasks_from_tickets(&tickets, &fields).unwrap();

        assert_eq!(forest.task_by_key("A").unwrap().progress_in_percent, 0.0);
    }

    #[test]
    fn test_invalid_date_fails_whole_batch() {
        let tickets = vec![
            ticket("A", "2024-01-01", "2024-01-02"),
            ticket("B", "next tuesday", "2024-01-02"),
        ];
        let err = create_tasks_from_tickets(&tickets, &fields()).unwrap_err();

        match err {
            GanttError::Parse(ParseError::InvalidDate { key, field, value }) => {
                assert_eq!(key, "B");
                assert_eq!(field, START);
                assert_eq!(value, "next tuesday");
            }
            other => panic!("期望日期解析错误，实际为 {:?}", other),
        }
    }

    #[test]
    fn test_non_string_date_is_invalid() {
        let tickets = vec![Ticket::new("A")
            .with_field(START, json!(20240101))
            .with_field(END, json!("2024-01-02"))];
        let err = create_tasks_from_tickets(&tickets, &fields()).unwrap_err();
        assert!(err.to_string().contains("20240101"));
    }

    #[test]
    fn test_jira_datetime_values_keep_date() {
        let tickets = vec![ticket(
            "A",
            "2024-01-01T09:30:00.000+0000",
            "2024-01-05T18:00:00.000+0000",
        )];
        let forest = create_tasks_from_tickets(&tickets, &fields()).unwrap();

        let a = forest.task_by_key("A").unwrap();
        assert_eq!(a.start_date, date(2024, 1, 1));
        assert_eq!(a.end_date, date(2024, 1, 5));
    }

    #[test]
    fn test_pre_order_visits_each_task_once_parent_first() {
        let tickets = vec![
            ticket("R1", "2024-01-01", "2024-03-01"),
            ticket("R1-A", "2024-01-02", "2024-01-10").with_parent("R1"),
            ticket("R1-A-1", "2024-01-03", "2024-01-04").with_parent("R1-A"),
            ticket("R2", "2024-01-04", "2024-02-01"),
            ticket("R1-B", "2024-01-05", "2024-01-06").with_parent("R1"),
            ticket("R2-A", "2024-01-06", "2024-01-07").with_parent("R2"),
        ];
        let forest = create_tasks_from_tickets(&tickets, &fields()).unwrap();
        let ordered = keys(&forest);

        assert_eq!(ordered.len(), forest.len());
        assert_eq!(
            ordered,
            vec!["R1", "R1-A", "R1-A-1", "R1-B", "R2", "R2-A"]
        );
        for task in forest.iter() {
            if let NodeRef::Task(parent) = task.parent() {
                let parent_key = &forest.get(parent).unwrap().key;
                let parent_pos = ordered.iter().position(|k| k == parent_key).unwrap();
                let child_pos = ordered.iter().position(|k| *k == task.key).unwrap();
                assert!(parent_pos < child_pos);
            }
        }
    }
}

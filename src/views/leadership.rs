//! Leadership org chart

use serde::Serialize;

use crate::models::LeadershipMember;

/// Visible members ordered by `order`; the first is the top node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgChart {
    pub head: Option<LeadershipMember>,
    pub members: Vec<LeadershipMember>,
}

pub fn org_chart(members: &[LeadershipMember]) -> OrgChart {
    let mut visible: Vec<LeadershipMember> =
        members.iter().filter(|m| m.is_visible).cloned().collect();
    visible.sort_by_key(|m| m.order);

    let mut rest = visible.into_iter();
    OrgChart {
        head: rest.next(),
        members: rest.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn member(id: i64, order: i32, visible: bool) -> LeadershipMember {
        LeadershipMember {
            id,
            full_name: format!("Руководитель {}", id),
            position: "Член правления".to_string(),
            description: None,
            photo_url: None,
            order,
            is_visible: visible,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_head_is_lowest_order_visible_member() {
        let chart = org_chart(&[
            member(1, 3, true),
            member(2, 1, false),
            member(3, 2, true),
            member(4, 2, true),
        ]);
        assert_eq!(chart.head.map(|m| m.id), Some(3));
        assert_eq!(chart.members.iter().map(|m| m.id).collect::<Vec<_>>(), vec![4, 1]);
    }

    #[test]
    fn test_empty_chart() {
        let chart = org_chart(&[member(1, 0, false)]);
        assert!(chart.head.is_none());
        assert!(chart.members.is_empty());
    }
}

//! Team roster grouping
//!
//! Members are bucketed by `category|discipline`. Buckets keep the order in
//! which their key first appears in the input.

use serde::Serialize;

use crate::models::TeamMember;

/// Position substring (case-insensitive) that marks a junior squad
pub const JUNIOR_MARKER: &str = "юниор";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterGroup {
    pub key: String,
    pub category: String,
    pub discipline: Option<String>,
    pub juniors: bool,
    pub members: Vec<TeamMember>,
}

impl RosterGroup {
    /// Section heading, e.g. "Основной состав · Продуктовое программирование"
    pub fn title(&self) -> String {
        match &self.discipline {
            Some(discipline) => format!("{} · {}", self.category, discipline),
            None => self.category.clone(),
        }
    }
}

/// Grouping key of one member
pub fn group_key(member: &TeamMember) -> String {
    format!(
        "{}|{}",
        member.category,
        member.discipline.as_deref().unwrap_or("")
    )
}

pub fn is_junior(member: &TeamMember) -> bool {
    member
        .position
        .as_deref()
        .map(|position| position.to_lowercase().contains(JUNIOR_MARKER))
        .unwrap_or(false)
}

/// Group members; every member lands in exactly one bucket
pub fn group_members(members: &[TeamMember]) -> Vec<RosterGroup> {
    let mut groups: Vec<RosterGroup> = Vec::new();

    for member in members {
        let key = group_key(member);
        let index = match groups.iter().position(|group| group.key == key) {
            Some(index) => index,
            None => {
                groups.push(RosterGroup {
                    key,
                    category: member.category.clone(),
                    discipline: member.discipline.clone(),
                    juniors: false,
                    members: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[index];
        group.juniors |= is_junior(member);
        group.members.push(member.clone());
    }

    groups
}

//! View logic shared by the public pages and the admin client
//!
//! Pure functions over fetched collections: grouping, ordering, calendar
//! layout, tree flattening and display formatting. Nothing here touches the
//! database or the network.

pub mod calendar;
pub mod document_tree;
pub mod format;
pub mod leadership;
pub mod news;
pub mod roster;

pub use calendar::{CalendarState, DayCell, MonthGrid};
pub use document_tree::{render_rows, ExpandState, TreeRow};
pub use format::{format_date, format_file_size, month_title};
pub use leadership::{org_chart, OrgChart};
pub use news::{excerpt, NewsPage};
pub use roster::{group_members, RosterGroup};

/// Icon shown next to a discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisciplineIcon {
    Algorithm,
    Product,
    Security,
    Robotics,
    Drone,
    Generic,
}

impl DisciplineIcon {
    /// Map the `icon` key from federation info; unknown keys get a generic icon
    pub fn from_key(key: &str) -> Self {
        match key {
            "algorithm" => Self::Algorithm,
            "product" => Self::Product,
            "security" => Self::Security,
            "robotics" => Self::Robotics,
            "drone" => Self::Drone,
            _ => Self::Generic,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Algorithm => "🧮",
            Self::Product => "💻",
            Self::Security => "🛡️",
            Self::Robotics => "🤖",
            Self::Drone => "🚁",
            Self::Generic => "🏆",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discipline_icons_cover_federation_info() {
        for discipline in &crate::services::federation_info().disciplines {
            assert_ne!(DisciplineIcon::from_key(&discipline.icon), DisciplineIcon::Generic);
        }
        assert_eq!(DisciplineIcon::from_key("chess"), DisciplineIcon::Generic);
    }
}

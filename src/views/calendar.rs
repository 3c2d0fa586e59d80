//! Event calendar
//!
//! Month grid with Monday as the first column. Selection filters the event
//! list to one day; selecting the same day again clears it.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::models::Event;
use crate::views::format::month_title;

/// Most indicator dots a single day shows
pub const MAX_DOTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarState {
    /// First day of the shown month
    shown: NaiveDate,
    selected: Option<NaiveDate>,
    today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub event_count: usize,
    pub has_events: bool,
    /// `min(event_count, MAX_DOTS)`
    pub dots: usize,
    pub is_today: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub title: String,
    /// Empty cells before day 1
    pub leading_blanks: usize,
    pub days: Vec<DayCell>,
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

impl CalendarState {
    /// Current month, nothing selected
    pub fn new(today: NaiveDate) -> Self {
        Self {
            shown: first_of_month(today),
            selected: None,
            today,
        }
    }

    /// Show a given month; `None` for an invalid year/month pair
    pub fn at_month(today: NaiveDate, year: i32, month: u32) -> Option<Self> {
        Some(Self {
            shown: NaiveDate::from_ymd_opt(year, month, 1)?,
            selected: None,
            today,
        })
    }

    pub fn year(&self) -> i32 {
        self.shown.year()
    }

    pub fn month(&self) -> u32 {
        self.shown.month()
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    fn shows(&self, date: NaiveDate) -> bool {
        date.year() == self.shown.year() && date.month() == self.shown.month()
    }

    /// Select a day, or clear the selection if it is already selected
    ///
    /// Days outside the shown month are ignored; returns whether the day was
    /// taken.
    pub fn select(&mut self, day: NaiveDate) -> bool {
        if !self.shows(day) {
            return false;
        }
        if self.selected == Some(day) {
            self.selected = None;
        } else {
            self.selected = Some(day);
        }
        true
    }

    pub fn next_month(&mut self) {
        if let Some(next) = self.shown.checked_add_months(Months::new(1)) {
            self.show(next);
        }
    }

    pub fn prev_month(&mut self) {
        if let Some(prev) = self.shown.checked_sub_months(Months::new(1)) {
            self.show(prev);
        }
    }

    /// Jump to the current month and clear the selection
    pub fn go_today(&mut self) {
        self.shown = first_of_month(self.today);
        self.selected = None;
    }

    fn show(&mut self, first: NaiveDate) {
        self.shown = first;
        if self.selected.is_some_and(|day| !self.shows(day)) {
            self.selected = None;
        }
    }

    /// (year, month) of the previous and next months, for navigation links
    pub fn neighbours(&self) -> ((i32, u32), (i32, u32)) {
        let mut prev = self.clone();
        prev.prev_month();
        let mut next = self.clone();
        next.next_month();
        ((prev.year(), prev.month()), (next.year(), next.month()))
    }

    /// Build the grid for the shown month
    pub fn grid(&self, events: &[Event]) -> MonthGrid {
        let leading_blanks = self.shown.weekday().num_days_from_monday() as usize;
        let days = self
            .shown
            .iter_days()
            .take_while(|date| self.shows(*date))
            .map(|date| {
                let event_count = events.iter().filter(|e| e.event_date == date).count();
                DayCell {
                    date,
                    day: date.day(),
                    event_count,
                    has_events: event_count > 0,
                    dots: event_count.min(MAX_DOTS),
                    is_today: date == self.today,
                    is_selected: self.selected == Some(date),
                }
            })
            .collect();

        MonthGrid {
            year: self.year(),
            month: self.month(),
            title: month_title(self.year(), self.month()),
            leading_blanks,
            days,
        }
    }

    /// Events for the list panel: the selected day, else the shown month
    pub fn visible_events<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events
            .iter()
            .filter(|event| match self.selected {
                Some(day) => event.event_date == day,
                None => self.shows(event.event_date),
            })
            .collect()
    }
}

use std::cmp::Ordering;

use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::domain::{Category, WorkoutSession, WorkoutType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutTypeOrder {
    #[default]
    Name,
    Category,
    CreatedAt,
    UpdatedAt,
}

/// Filter and ordering for listing workout types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct WorkoutTypeQuery {
    pub category: Option<Category>,
    pub order: WorkoutTypeOrder,
    pub direction: Direction,
}

impl WorkoutTypeQuery {
    pub fn matches(&self, t: &WorkoutType) -> bool {
        self.category.map_or(true, |c| t.category == c)
    }

    pub fn sort(&self, items: &mut [WorkoutType]) {
        items.sort_by(|a, b| {
            let ord = match self.order {
                WorkoutTypeOrder::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                WorkoutTypeOrder::Category => a
                    .category
                    .cmp(&b.category)
                    .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
                WorkoutTypeOrder::CreatedAt => a.created_at.cmp(&b.created_at),
                WorkoutTypeOrder::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            self.direction.apply(ord)
        });
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrder {
    #[default]
    Date,
    Duration,
    CreatedAt,
    UpdatedAt,
}

/// Filter, ordering and paging for listing sessions. Date bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionQuery {
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub exercise_id: Option<Uuid>,
    pub order: SessionOrder,
    pub direction: Direction,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Default for SessionQuery {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            exercise_id: None,
            order: SessionOrder::Date,
            direction: Direction::Desc,
            limit: None,
            offset: 0,
        }
    }
}

impl SessionQuery {
    pub fn between(from: Date, to: Date) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }

    pub fn matches(&self, s: &WorkoutSession) -> bool {
        self.from.map_or(true, |from| s.date >= from)
            && self.to.map_or(true, |to| s.date <= to)
            && self.exercise_id.map_or(true, |id| s.includes_exercise(id))
    }

    /// Sorts, then applies offset/limit.
    pub fn arrange(&self, mut items: Vec<WorkoutSession>) -> Vec<WorkoutSession> {
        items.sort_by(|a, b| {
            let ord = match self.order {
                SessionOrder::Date => a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)),
                SessionOrder::Duration => a.duration_minutes.cmp(&b.duration_minutes),
                SessionOrder::CreatedAt => a.created_at.cmp(&b.created_at),
                SessionOrder::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            self.direction.apply(ord)
        });
        let paged = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => paged.take(limit).collect(),
            None => paged.collect(),
        }
    }
}

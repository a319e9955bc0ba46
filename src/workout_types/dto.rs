use serde::{Deserialize, Serialize};

use crate::domain::{Category, WorkoutType};
use crate::store::{Direction, WorkoutTypeOrder, WorkoutTypeQuery};

/// `GET /workout-types?category=upper&order=name&direction=asc`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<Category>,
    pub order: Option<WorkoutTypeOrder>,
    pub direction: Option<Direction>,
}

impl ListParams {
    pub fn into_query(self) -> WorkoutTypeQuery {
        WorkoutTypeQuery {
            category: self.category,
            order: self.order.unwrap_or_default(),
            direction: self.direction.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DefaultsLoaded {
    pub created: usize,
    pub items: Vec<WorkoutType>,
}

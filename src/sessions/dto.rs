use serde::Deserialize;
use uuid::Uuid;

use crate::domain::dates::parse_optional_date;
use crate::error::AppError;
use crate::store::{Direction, SessionOrder, SessionQuery};

/// `GET /sessions` and `GET /sessions/stream` query string. Dates are `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub exercise_id: Option<Uuid>,
    pub order: Option<SessionOrder>,
    pub direction: Option<Direction>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListParams {
    pub fn into_query(self) -> Result<SessionQuery, AppError> {
        let defaults = SessionQuery::default();
        Ok(SessionQuery {
            from: parse_optional_date("from", self.from.as_deref())?,
            to: parse_optional_date("to", self.to.as_deref())?,
            exercise_id: self.exercise_id,
            order: self.order.unwrap_or(defaults.order),
            direction: self.direction.unwrap_or(defaults.direction),
            limit: self.limit,
            offset: self.offset.unwrap_or(0),
        })
    }
}

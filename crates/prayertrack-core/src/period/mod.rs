mod countdown;
mod engine;
mod kind;
mod schedule;

pub use countdown::Countdown;
pub use engine::{
    anchor_next_boundary, crosses_midnight, locate_active_period, ActiveWindow, PeriodEngine,
};
pub use kind::{is_actionable, Period, PERIOD_COUNT};
pub use schedule::PeriodSchedule;

pub mod plan;
pub mod state;
pub mod user_state;

pub use plan::{
  DayMap, Plan, PlanLayout, Priority, RawDayMap, RawSession, RawWeek, Role, Session, SessionType,
  Slot, Week, Weekday,
};
pub use state::{CompletionMap, PersistedState, WeekOverride};
pub use user_state::{FatigueLevel, MissedSession, SleepQuality, UserStateSnapshot};

//! The parent side of the app: the password gate, giving golden eggs and study goals.

mod cookie;
mod goals;
mod log_in;
mod middleware;
mod panel_page;
mod rewards;

pub use goals::{StudyGoal, StudyGoals};
pub use log_in::{ParentLogInState, get_parent_log_in_page, get_parent_log_out, post_parent_log_in};
pub use middleware::{ParentGuardState, parent_guard, parent_guard_hx};
pub use panel_page::{
    ParentState, add_goal_endpoint, award_eggs_endpoint, complete_goal_endpoint, get_parent_page,
};
pub use rewards::{DEFAULT_REWARD_REASON, RewardLog, RewardLogEntry};

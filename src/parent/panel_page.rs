//! The parent panel: giving golden eggs, the reward log and study goals.
//!
//! Like the shop, the endpoints answer with the whole page so htmx can swap
//! in the fresh `main` element, and answer errors with an alert.

use axum::{
    Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    alert::Alert,
    app_state::{SharedShop, lock_shop},
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, egg_badge, format_eggs,
    },
    ledger::EggAmount,
    navigation::NavBar,
    parent::{RewardLog, StudyGoal, StudyGoals},
    storage::SqliteStore,
    timezone::get_local_offset,
};

/// The number of eggs the award form starts with.
const DEFAULT_AWARD: u64 = 1;
/// The reward the new goal form starts with.
const DEFAULT_GOAL_REWARD: u64 = 5;

/// The state needed for the parent panel.
#[derive(Debug, Clone)]
pub struct ParentState {
    pub shop: SharedShop,
    pub store: SqliteStore,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ParentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            shop: state.shop.clone(),
            store: state.store.clone(),
            local_timezone: state.config.local_timezone.clone(),
        }
    }
}

/// The form data for giving golden eggs.
#[derive(Debug, Deserialize)]
pub struct AwardForm {
    pub eggs: u64,
    #[serde(default)]
    pub reason: String,
}

/// The form data for a new study goal.
#[derive(Debug, Deserialize)]
pub struct GoalForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub reward: u64,
}

/// Render the parent panel.
pub async fn get_parent_page(State(state): State<ParentState>) -> Result<Response, Error> {
    let shop = lock_shop(&state.shop)?;
    let log = RewardLog::load(&state.store)?;
    let goals = StudyGoals::load(&state.store)?;

    Ok(panel_view(shop.balance(), &log, &goals, None).into_response())
}

/// Give golden eggs to the child and record why.
pub async fn award_eggs_endpoint(
    State(state): State<ParentState>,
    Form(form): Form<AwardForm>,
) -> Response {
    award_eggs(&state, &form).unwrap_or_else(Error::into_alert_response)
}

fn award_eggs(state: &ParentState, form: &AwardForm) -> Result<Response, Error> {
    let eggs = EggAmount::new(form.eggs)?;
    let today = local_date(&state.local_timezone)?;

    let mut shop = lock_shop(&state.shop)?;
    let mut log = RewardLog::load(&state.store)?;
    let balance = log.award(shop.ledger_mut(), eggs, &form.reason, today)?;
    let goals = StudyGoals::load(&state.store)?;

    let notice = Alert::Success {
        message: format!("Gave {} golden eggs!", format_eggs(eggs.get())),
        details: format!("The balance is now {} golden eggs.", format_eggs(balance)),
    };

    Ok(panel_view(balance, &log, &goals, Some(notice)).into_response())
}

/// Add a study goal.
pub async fn add_goal_endpoint(
    State(state): State<ParentState>,
    Form(form): Form<GoalForm>,
) -> Response {
    add_goal(&state, &form).unwrap_or_else(Error::into_alert_response)
}

fn add_goal(state: &ParentState, form: &GoalForm) -> Result<Response, Error> {
    let reward = EggAmount::new(form.reward)?;

    let shop = lock_shop(&state.shop)?;
    let mut goals = StudyGoals::load(&state.store)?;
    let title = goals
        .add(&state.store, &form.title, &form.description, reward)?
        .title
        .clone();
    let log = RewardLog::load(&state.store)?;

    let notice = Alert::SuccessSimple {
        message: format!("Added the goal \"{title}\""),
    };

    Ok(panel_view(shop.balance(), &log, &goals, Some(notice)).into_response())
}

/// Mark a study goal as completed and give its reward.
pub async fn complete_goal_endpoint(
    State(state): State<ParentState>,
    Path(goal_id): Path<u32>,
) -> Response {
    complete_goal(&state, goal_id).unwrap_or_else(Error::into_alert_response)
}

fn complete_goal(state: &ParentState, goal_id: u32) -> Result<Response, Error> {
    let mut shop = lock_shop(&state.shop)?;
    let mut goals = StudyGoals::load(&state.store)?;
    let balance = goals.complete(shop.ledger_mut(), goal_id)?;
    let log = RewardLog::load(&state.store)?;

    let notice = goals
        .goals()
        .iter()
        .find(|goal| goal.id == goal_id)
        .map(|goal| Alert::Success {
            message: format!("\"{}\" completed!", goal.title),
            details: format!(
                "Gave {} golden eggs. The balance is now {} golden eggs.",
                format_eggs(goal.reward.get()),
                format_eggs(balance)
            ),
        });

    Ok(panel_view(balance, &log, &goals, notice).into_response())
}

/// Today's date in the timezone `canonical_timezone`.
fn local_date(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

fn panel_view(
    balance: u64,
    log: &RewardLog,
    goals: &StudyGoals,
    notice: Option<Alert>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::PARENT_VIEW).into_html();
    let total_awarded = log
        .entries()
        .iter()
        .fold(0u64, |total, entry| total.saturating_add(entry.eggs.get()));
    let completed_goals = goals.goals().iter().filter(|goal| goal.completed).count();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            main
                hx-target="this"
                hx-select="main"
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                class="w-full max-w-5xl space-y-6"
            {
                div class="flex flex-col md:flex-row justify-between items-center gap-4"
                {
                    h1 class="text-3xl font-bold text-pink-600 dark:text-pink-400" { "Parent Admin Panel" }

                    div class="flex items-center gap-4"
                    {
                        div id="balance" class="flex items-center gap-2"
                        {
                            (egg_badge(balance))
                            span class="text-gray-500 dark:text-gray-400" { "golden eggs" }
                        }

                        a
                            href=(endpoints::PARENT_LOG_OUT)
                            class="text-sm font-semibold text-gray-600 hover:text-pink-600 dark:text-gray-300"
                        {
                            "Lock panel"
                        }
                    }
                }

                @if let Some(notice) = notice {
                    div id="notice" { (notice.into_markup()) }
                }

                div class="grid gap-6 md:grid-cols-2"
                {
                    (award_form())

                    section id="reward-log" class={ (CARD_STYLE) " p-6 space-y-4" }
                    {
                        h2 class="text-xl font-semibold" { "Study Achievements" }
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            (format_eggs(total_awarded)) " eggs given, "
                            (completed_goals) " of " (goals.goals().len()) " goals completed"
                        }

                        @if log.entries().is_empty() {
                            p class="text-gray-500 dark:text-gray-400" { "No golden eggs given yet." }
                        } @else {
                            ul class="space-y-3 max-h-96 overflow-y-auto"
                            {
                                @for entry in log.entries() {
                                    li class="flex justify-between items-center p-3 rounded-lg bg-pink-50 dark:bg-gray-700"
                                    {
                                        div
                                        {
                                            h3 class="font-medium" { (entry.reason) }
                                            p class="text-sm text-gray-500 dark:text-gray-400" { (entry.date) }
                                        }

                                        span class=(BADGE_STYLE) { "🥚 " (entry.eggs) " eggs" }
                                    }
                                }
                            }
                        }
                    }
                }

                section id="study-goals" class={ (CARD_STYLE) " p-6 space-y-4" }
                {
                    h2 class="text-xl font-semibold" { "Study Goals" }
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Set and manage study goals with egg rewards"
                    }

                    ul class="space-y-4"
                    {
                        @for goal in goals.goals() {
                            (goal_item(goal))
                        }
                    }

                    (goal_form())
                }
            }
        }
    };

    base("Parent Panel", &content)
}

fn award_form() -> Markup {
    html! {
        form
            id="award-form"
            hx-post=(endpoints::REWARDS_API)
            class={ (CARD_STYLE) " p-6 space-y-4" }
        {
            h2 class="text-xl font-semibold" { "Add Golden Eggs" }
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Reward your child with golden eggs for completing study activities"
            }

            div
            {
                label for="eggs" class=(FORM_LABEL_STYLE) { "Number of Eggs" }
                input
                    id="eggs"
                    name="eggs"
                    type="number"
                    min="1"
                    step="1"
                    value=(DEFAULT_AWARD)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="reason" class=(FORM_LABEL_STYLE) { "Reason for Reward" }
                textarea
                    id="reason"
                    name="reason"
                    rows="3"
                    placeholder="e.g., Completed math homework, Read for 30 minutes"
                    class=(FORM_TEXT_INPUT_STYLE)
                {}
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Golden Eggs" }
        }
    }
}

fn goal_item(goal: &StudyGoal) -> Markup {
    html! {
        li data-goal-id=(goal.id) class="p-4 rounded-lg border border-pink-100 dark:border-gray-700"
        {
            div class="flex justify-between items-start mb-2"
            {
                h3 class="font-medium" { (goal.title) }

                span class=(BADGE_STYLE)
                {
                    @if goal.completed { "Completed" } @else { "In Progress" }
                }
            }

            p class="text-sm text-gray-500 dark:text-gray-400 mb-2" { (goal.description) }

            div class="flex items-center justify-between gap-4"
            {
                span class="text-sm" { "🥚 " (goal.reward) " eggs reward" }

                @if !goal.completed {
                    button
                        type="button"
                        hx-post=(format_endpoint(endpoints::COMPLETE_GOAL, goal.id))
                        hx-confirm={ "Mark \"" (goal.title) "\" as completed and give " (goal.reward) " golden eggs?" }
                        class={ (BUTTON_SECONDARY_STYLE) " md:w-auto" }
                    {
                        "Mark Completed"
                    }
                }
            }
        }
    }
}

fn goal_form() -> Markup {
    html! {
        form
            id="goal-form"
            hx-post=(endpoints::GOALS_API)
            class="space-y-4 pt-4 border-t border-pink-100 dark:border-gray-700"
        {
            h3 class="text-lg font-semibold" { "Add New Goal" }

            div
            {
                label for="title" class=(FORM_LABEL_STYLE) { "Goal Title" }
                input
                    id="title"
                    name="title"
                    type="text"
                    placeholder="e.g., Complete Math Worksheet"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                textarea
                    id="description"
                    name="description"
                    rows="2"
                    placeholder="Describe what needs to be done"
                    class=(FORM_TEXT_INPUT_STYLE)
                {}
            }

            div
            {
                label for="reward" class=(FORM_LABEL_STYLE) { "Egg Reward" }
                input
                    id="reward"
                    name="reward"
                    type="number"
                    min="1"
                    step="1"
                    value=(DEFAULT_GOAL_REWARD)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Goal" }
        }
    }
}

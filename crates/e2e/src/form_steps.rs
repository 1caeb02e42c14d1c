//! Step definitions for the message form scenario
//!
//! ```text
//! Given the user is on the form page
//! When the user enters "hello world" into the message field
//! When the user clicks the submit button
//! Then the message "hello world" should be displayed on the page
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use formcheck_steps::{assert_text_eq, StepArgs, StepFuture, StepRegistry, StepResult};

use crate::page::PageSession;

pub const NAVIGATE: &str = "the user is on the form page";
pub const ENTER_MESSAGE: &str = "the user enters {string} into the message field";
pub const CLICK_SUBMIT: &str = "the user clicks the submit button";
pub const MESSAGE_DISPLAYED: &str = "the message {string} should be displayed on the page";

/// Where the form lives and how its elements are located
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormTarget {
    pub url: String,
    pub message_selector: String,
    pub submit_selector: String,
    pub display_selector: String,
}

impl Default for FormTarget {
    fn default() -> Self {
        Self {
            url: "https://www.lambdatest.com/selenium-playground/simple-form-demo".to_string(),
            message_selector: "#user-message".to_string(),
            submit_selector: "#showInput".to_string(),
            display_selector: "#message".to_string(),
        }
    }
}

/// Execution context of one form scenario
pub struct FormWorld {
    pub page: Box<dyn PageSession>,
    pub target: FormTarget,
}

impl FormWorld {
    pub fn new(page: Box<dyn PageSession>, target: FormTarget) -> Self {
        Self { page, target }
    }
}

fn open_form_page(world: &mut FormWorld, _: StepArgs) -> StepFuture<'_> {
    Box::pin(async move {
        debug!("Navigating to {}", world.target.url);
        world.page.goto(&world.target.url).await?;
        Ok(())
    })
}

fn enter_message(world: &mut FormWorld, args: StepArgs) -> StepFuture<'_> {
    Box::pin(async move {
        let message = args.str(0)?;
        world
            .page
            .fill(&world.target.message_selector, message)
            .await?;
        Ok(())
    })
}

fn click_submit(world: &mut FormWorld, _: StepArgs) -> StepFuture<'_> {
    Box::pin(async move {
        world.page.click(&world.target.submit_selector).await?;
        Ok(())
    })
}

fn message_displayed(world: &mut FormWorld, args: StepArgs) -> StepFuture<'_> {
    Box::pin(async move {
        let expected = args.str(0)?;
        let displayed = world
            .page
            .text_content(&world.target.display_selector)
            .await?;
        assert_text_eq(expected, displayed.as_deref())
    })
}

/// Add the four form steps to `registry`.
pub fn register_form_steps(registry: &mut StepRegistry<FormWorld>) -> StepResult<()> {
    registry
        .given(NAVIGATE, open_form_page)?
        .when(ENTER_MESSAGE, enter_message)?
        .when(CLICK_SUBMIT, click_submit)?
        .then(MESSAGE_DISPLAYED, message_displayed)?;
    Ok(())
}

pub fn form_registry() -> StepResult<StepRegistry<FormWorld>> {
    let mut registry = StepRegistry::new();
    register_form_steps(&mut registry)?;
    Ok(registry)
}

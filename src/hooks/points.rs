//! Well-known extension points used by the core

use super::HookPoint;
use crate::config::SiteConfig;
use crate::menu::Menu;
use crate::render::PageContext;
use crate::Site;

/// Decides whether a file is renderable text; every handler must agree
pub type IsTextFileFn = dyn Fn(&str, &[u8]) -> bool + Send + Sync;

/// Mutates a freshly built menu in place
pub type ConstructMenuFn = dyn Fn(&SiteConfig, &mut Menu) + Send + Sync;

/// Produces a markup fragment for the page being rendered
pub type RenderHookFn = dyn Fn(&PageContext) -> String + Send + Sync;

/// Build and serve lifecycle callback
pub type LifecycleFn = dyn Fn(&Site) -> anyhow::Result<()> + Send + Sync;

/// Runs before a page's content is rendered and may adjust its context
pub type PreRenderFn = dyn Fn(&Site, &mut PageContext) -> anyhow::Result<()> + Send + Sync;

pub const IS_TEXT_FILE: HookPoint<IsTextFileFn> = HookPoint::new("is_text_file");
pub const CONSTRUCT_MENU: HookPoint<ConstructMenuFn> = HookPoint::new("construct_menu");
pub const RENDER_NAVBAR_CONTENT: HookPoint<RenderHookFn> = HookPoint::new("render_navbar_content");
pub const BEFORE_BUILD: HookPoint<LifecycleFn> = HookPoint::new("before_build");
pub const AFTER_BUILD: HookPoint<LifecycleFn> = HookPoint::new("after_build");
pub const BEFORE_SERVE: HookPoint<LifecycleFn> = HookPoint::new("before_serve");
pub const PRE_RENDER: HookPoint<PreRenderFn> = HookPoint::new("pre_render");

/// Declare every well-known point so named registrations are type checked
pub fn declare_core_points(registry: &mut super::HookRegistry) -> Result<(), super::HookError> {
    registry.declare(IS_TEXT_FILE)?;
    registry.declare(CONSTRUCT_MENU)?;
    registry.declare(RENDER_NAVBAR_CONTENT)?;
    registry.declare(BEFORE_BUILD)?;
    registry.declare(AFTER_BUILD)?;
    registry.declare(BEFORE_SERVE)?;
    registry.declare(PRE_RENDER)?;
    Ok(())
}

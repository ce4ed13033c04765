//! Bundled demo application and fixtures.
//!
//! The demo is a small game front end built on [`MockHost`]:
//!
//! - `Menu`: a `Play` button that loads `Level1`, an `Add` button that bumps
//!   the `Score` label, a `Stick` joystick (primary) that reports its state in
//!   the `StickState` label, and a `Door` button that plays the `Open` clip.
//! - `Level1`: an `Exit` button back to the menu and an `Enemy` that spawns
//!   half a second after the level starts.

use frametest::prelude::*;
use std::collections::BTreeMap;
use std::time::Duration;

/// Build the demo host at `fps` simulated frames per second
#[must_use]
pub fn demo_host(fps: u32) -> MockHost {
    let delta = 1.0 / fps.max(1) as f32;
    let mut host = MockHost::new("Boot")
        .with_delta_time(delta)
        .with_scene("Menu", build_menu)
        .with_scene("Level1", build_level);
    host.set_scene_load_frames(3);
    host.load_scene("Menu");

    host.on_event("Play", EventKind::Click, |h, _| h.load_scene("Level1"));
    host.on_event("Exit", EventKind::Click, |h, _| h.load_scene("Menu"));
    host.on_event("Add", EventKind::Click, |h, _| {
        if let Some(score) = h.find_by_name("Score") {
            let current: u32 = h.text(score).and_then(|t| t.parse().ok()).unwrap_or(0);
            h.set_text(score, &(current + 1).to_string());
        }
    });
    host.on_event("Door", EventKind::Click, |h, _| {
        if let Some(door) = h.find_by_name("Door") {
            h.play_animation(door, "Open");
        }
    });
    for (kind, state) in [
        (EventKind::PointerDown, "held"),
        (EventKind::Drag, "dragging"),
        (EventKind::PointerUp, "released"),
    ] {
        host.on_event("Stick", kind, move |h, _| {
            if let Some(label) = h.find_by_name("StickState") {
                h.set_text(label, state);
            }
        });
    }
    host
}

fn build_menu(h: &mut MockHost) {
    let play = h.spawn("Play");
    h.add_capability(play, Capability::Clickable);
    let add = h.spawn("Add");
    h.add_capability(add, Capability::Clickable);
    let score = h.spawn("Score");
    h.set_text(score, "0");
    let stick = h.spawn("Stick");
    h.add_capability(stick, Capability::directional(Direction::Primary));
    let state = h.spawn("StickState");
    h.set_text(state, "idle");
    let door = h.spawn("Door");
    h.add_capability(door, Capability::Clickable);
}

fn build_level(h: &mut MockHost) {
    let exit = h.spawn("Exit");
    h.add_capability(exit, Capability::Clickable);
    let at = h.elapsed() + 0.5;
    h.schedule(at, |h| {
        let enemy = h.spawn("Enemy");
        h.add_capability(enemy, Capability::named("Health"));
    });
}

// =============================================================================
// FIXTURES
// =============================================================================

/// Menu interactions
#[derive(Debug, Default)]
pub struct MenuFixture {
    presses: u32,
}

impl MenuFixture {
    async fn open_menu(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
        ctx.wait_for(Condition::scene_loaded("Menu")).await?;
        ctx.wait_for_object("Play").await.map(|_| ())
    }

    async fn add_score(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
        for _ in 0..3 {
            ctx.press("Add").await?;
            self.presses += 1;
        }
        ctx.assert_label("Score", &self.presses.to_string()).await
    }

    async fn joystick(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
        let stick = ctx.wait_for_object("Stick").await?;
        ctx.pointer_down_handle(stick, Direction::Primary).await?;
        ctx.assert_label("StickState", "held").await?;
        ctx.pointer_drag_handle(stick, Direction::Primary, Vec2::new(24.0, -8.0))
            .await?;
        ctx.assert_label("StickState", "dragging").await?;
        ctx.pointer_up_handle(stick, Direction::Primary).await?;
        ctx.assert_label("StickState", "released").await
    }

    async fn open_door(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
        ctx.press("Door").await?;
        ctx.wait_for(Condition::animation_playing("Door", "Open"))
            .await
            .map(|_| ())
    }

    async fn wrong_score(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
        let quick = ctx.with_options(ctx.options().with_timeout(Duration::from_millis(500)));
        quick.assert_label("Score", "99").await
    }

    async fn reset(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
        if ctx.host().read(|h| h.active_scene_name()) != "Menu" {
            ctx.load_scene("Menu").await?;
        }
        Ok(())
    }
}

impl UiFixture for MenuFixture {
    fn name() -> &'static str {
        "Menu"
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::<Self>::new()
            .setup("open_menu", |f, ctx| Box::pin(f.open_menu(ctx)))
            .test("add_score", |f, ctx| Box::pin(f.add_score(ctx)))
            .test("joystick", |f, ctx| Box::pin(f.joystick(ctx)))
            .test("open_door", |f, ctx| Box::pin(f.open_door(ctx)))
            .test("wrong_score", |f, ctx| Box::pin(f.wrong_score(ctx)))
            .teardown("reset", |f, ctx| Box::pin(f.reset(ctx)))
    }
}

/// Level flow
#[derive(Debug, Default)]
pub struct LevelFixture;

impl LevelFixture {
    async fn enter_level(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
        ctx.wait_for(Condition::scene_loaded("Menu")).await?;
        ctx.press("Play").await?;
        ctx.wait_for(Condition::scene_loaded("Level1")).await.map(|_| ())
    }

    async fn enemy_spawns(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
        ctx.wait_for(Condition::capability_appeared(Capability::named("Health")))
            .await?;
        let enemy = ctx.find("Enemy")?;
        if ctx.host().read(|h| h.is_active(enemy)) {
            Ok(())
        } else {
            Err(FrameTestError::not_found("Active object", "Enemy"))
        }
    }

    async fn exit_to_menu(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
        ctx.press("Exit").await?;
        ctx.wait_for_object_gone("Exit").await?;
        ctx.wait_for(Condition::scene_loaded("Menu")).await?;
        ctx.assert_label("Score", "0").await
    }

    async fn reload_by_path(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
        ctx.load_scene_by_path("Assets/Scenes/Menu.scene").await?;
        ctx.wait_for_object("Play").await.map(|_| ())
    }
}

impl UiFixture for LevelFixture {
    fn name() -> &'static str {
        "Level"
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::<Self>::new()
            .setup("enter_level", |f, ctx| Box::pin(f.enter_level(ctx)))
            .test("enemy_spawns", |f, ctx| Box::pin(f.enemy_spawns(ctx)))
            .test("exit_to_menu", |f, ctx| Box::pin(f.exit_to_menu(ctx)))
            .test("reload_by_path", |f, ctx| Box::pin(f.reload_by_path(ctx)))
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Starts a run of one test on a fixture host
pub type StartFn = fn(&mut FixtureHost, &str) -> FrameTestResult<()>;

/// A fixture type known to the CLI
#[derive(Debug, Clone)]
pub struct FixtureEntry {
    /// Fixture name
    pub name: &'static str,
    /// Test names in registration order
    pub tests: Vec<&'static str>,
    /// Run starter
    pub start: StartFn,
}

impl FixtureEntry {
    fn of<F: UiFixture>() -> Self {
        Self {
            name: F::name(),
            tests: F::methods().test_names(),
            start: |host, test| host.start::<F>(test),
        }
    }
}

/// Bundled fixtures, keyed by name
#[must_use]
pub fn registry() -> BTreeMap<&'static str, FixtureEntry> {
    [FixtureEntry::of::<MenuFixture>(), FixtureEntry::of::<LevelFixture>()]
        .into_iter()
        .map(|entry| (entry.name, entry))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lists_both_fixtures() {
        let registry = registry();
        assert_eq!(registry.keys().copied().collect::<Vec<_>>(), vec!["Level", "Menu"]);
        assert_eq!(
            registry["Menu"].tests,
            vec!["add_score", "joystick", "open_door", "wrong_score"]
        );
    }

    #[test]
    fn test_demo_host_boots_into_menu() {
        let mut host = demo_host(60);
        assert_eq!(host.active_scene_name(), "Boot");
        for _ in 0..3 {
            host.advance_frame();
        }
        assert_eq!(host.active_scene_name(), "Menu");
        assert!(host.find_by_name("Play").is_some());
    }

    #[test]
    fn test_enemy_spawns_after_level_start() {
        let mut host = demo_host(10);
        host.set_scene_load_frames(0);
        host.load_scene("Level1");
        assert!(host.find_by_name("Enemy").is_none());
        for _ in 0..6 {
            host.advance_frame();
        }
        assert!(host.find_by_name("Enemy").is_some());
    }
}

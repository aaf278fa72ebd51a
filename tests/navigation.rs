mod common;

use common::{harness, SILAY};
use mapdemo::core::config::PermissionPolicy;
use mapdemo::prelude::*;

#[tokio::test]
async fn test_shell_starts_on_the_map_tab() {
    let h = harness(PermissionPolicy::DenyAll, None, Ok(30.0), Ok("Silay"));
    let shell = NavigationShell::new(h.services).unwrap();

    assert_eq!(shell.current(), Destination::Map);
    assert_eq!(shell.screen().state(), ScreenState::Configuring);
    assert_eq!(shell.destinations().len(), 5);
}

#[tokio::test]
async fn test_switching_tabs_builds_a_fresh_screen() {
    let h = harness(PermissionPolicy::GrantAll, Some(SILAY), Ok(30.0), Ok("Silay"));
    let mut shell = NavigationShell::new(h.services).unwrap();
    shell.screen_mut().on_layout(Point::new(800.0, 600.0)).unwrap();

    for destination in [Destination::Points, Destination::Plot, Destination::Marker] {
        shell.select(destination).unwrap();
        assert_eq!(shell.current(), destination);
        assert_eq!(shell.screen().config().destination, destination);
        assert_eq!(shell.screen().state(), ScreenState::Configuring);
        assert_eq!(shell.screen().surface().release_count(), 0);
    }

    let overlays = shell.screen().surface().overlays();
    // Custom marker plus the location overlay
    assert_eq!(overlays.len(), 2);
}

#[tokio::test]
async fn test_reselecting_the_current_tab_rebuilds_it() {
    let h = harness(PermissionPolicy::DenyAll, None, Ok(30.0), Ok("Silay"));
    let mut shell = NavigationShell::starting_at(h.services, Destination::Points).unwrap();
    shell.screen_mut().zoom_in();
    let zoomed = shell.screen().surface().viewport.zoom;

    shell.select(Destination::Points).unwrap();
    assert_eq!(shell.current(), Destination::Points);
    assert!(shell.screen().surface().viewport.zoom < zoomed);
}

#[tokio::test]
async fn test_results_for_a_closed_tab_are_dropped() {
    let h = harness(PermissionPolicy::GrantAll, Some(SILAY), Ok(30.0), Ok("Silay"));
    let mut shell = NavigationShell::starting_at(h.services, Destination::Weather).unwrap();
    shell.screen_mut().on_layout(Point::new(800.0, 600.0)).unwrap();

    // Leave before anything has been pumped
    shell.select(Destination::Map).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    shell.screen_mut().pump();

    assert!(h.calls.lock().unwrap().is_empty());
    assert!(shell.screen().weather_reading().is_none());
}

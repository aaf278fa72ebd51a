mod common;

use common::{harness, open, pump_until, render, settle, SILAY};
use mapdemo::core::config::PermissionPolicy;
use mapdemo::core::map::SurfaceState;
use mapdemo::location::FixedLocationProvider;
use mapdemo::prelude::*;
use mapdemo::screen::config::{PLOT_LOOP, ROUTE_ID};

fn location_dots(context: &RenderContext) -> Vec<&DrawCommand> {
    context
        .commands()
        .iter()
        .filter(|command| matches!(command, DrawCommand::LocationDot { .. }))
        .collect()
}

#[tokio::test]
async fn test_granted_location_shows_the_dot() {
    let h = harness(PermissionPolicy::GrantAll, Some(SILAY), Ok(30.0), Ok("Silay"));
    let mut screen = open(ScreenConfig::map(), h.services);

    assert!(pump_until(&mut screen, |s| s.surface().location_overlay().and_then(|l| l.my_location()).is_some()).await);
    assert!(screen.is_location_enabled());
    let permission = screen.permission().unwrap();
    assert!(permission.fine && permission.coarse);

    // Following the fix recenters the map
    assert_eq!(screen.surface().viewport.center, SILAY);
    assert_eq!(location_dots(&render(&mut screen)).len(), 1);
}

#[tokio::test]
async fn test_coarse_only_still_enables_location() {
    let h = harness(PermissionPolicy::CoarseOnly, Some(SILAY), Ok(30.0), Ok("Silay"));
    let mut screen = open(ScreenConfig::points(), h.services);

    assert!(pump_until(&mut screen, |s| s.permission().is_some()).await);
    let permission = screen.permission().unwrap();
    assert!(!permission.fine);
    assert!(permission.coarse);
    assert!(screen.is_location_enabled());
}

#[tokio::test]
async fn test_denied_location_leaves_overlay_off() {
    let h = harness(PermissionPolicy::DenyAll, Some(SILAY), Ok(30.0), Ok("Silay"));
    let mut screen = open(ScreenConfig::custom_marker(), h.services);

    assert!(pump_until(&mut screen, |s| s.permission().is_some()).await);
    settle(&mut screen).await;

    assert!(!screen.is_location_enabled());
    assert_eq!(screen.active_tasks(), 0);
    let context = render(&mut screen);
    assert!(location_dots(&context).is_empty());
    // The static marker is still there
    assert_eq!(context.markers().count(), 1);
}

#[tokio::test]
async fn test_custom_marker_screen_recenters_on_first_fix() {
    let h = harness(PermissionPolicy::GrantAll, Some(SILAY), Ok(30.0), Ok("Silay"));
    let mut screen = open(ScreenConfig::custom_marker(), h.services);

    assert!(pump_until(&mut screen, |s| s.surface().viewport.center == SILAY).await);
    let context = render(&mut screen);
    let dots = location_dots(&context);
    assert_eq!(dots.len(), 1);
    assert!(matches!(
        dots[0],
        DrawCommand::LocationDot {
            icon: Some(MarkerIcon::Crosshair),
            accuracy_radius: Some(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_points_and_plot_render_every_coordinate() {
    let h = harness(PermissionPolicy::DenyAll, None, Ok(30.0), Ok("Silay"));

    let mut points = open(ScreenConfig::points(), h.services.clone());
    assert_eq!(render(&mut points).markers().count(), 6);

    let mut plot = open(ScreenConfig::plot(), h.services);
    let context = render(&mut plot);
    assert_eq!(context.markers().count(), 9);

    let polylines: Vec<_> = context.polylines().collect();
    assert_eq!(polylines.len(), 1);
    let DrawCommand::Polyline { points, width, .. } = polylines[0] else {
        unreachable!()
    };
    assert_eq!(points.len(), 9);
    // Closing segment from the last point back to the first
    assert_eq!(points.first(), points.last());
    assert_eq!(*width, 10.0);

    // Routes draw beneath markers
    let route_index = context
        .commands()
        .iter()
        .position(|c| matches!(c, DrawCommand::Polyline { .. }))
        .unwrap();
    let first_marker = context
        .commands()
        .iter()
        .position(|c| matches!(c, DrawCommand::Marker { .. }))
        .unwrap();
    assert!(route_index < first_marker);
}

#[tokio::test]
async fn test_tapping_the_plot_route_shows_its_length() {
    let h = harness(PermissionPolicy::DenyAll, None, Ok(30.0), Ok("Silay"));
    let plot = open(ScreenConfig::plot(), h.services);
    let viewport = &plot.surface().viewport;

    let start = viewport.position_to_screen(&PLOT_LOOP[1]);
    let end = viewport.position_to_screen(&PLOT_LOOP[2]);
    let midway = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);

    let route = plot.surface().overlays().get_as::<Route>(ROUTE_ID).unwrap();
    let length = route.length_meters();
    // Eight sides around the loop, about 1.2 km in all
    assert!((length - 1210.0).abs() < 60.0, "length was {length}");
    assert_eq!(plot.tap(midway), Some(route.summary()));
    assert!(route.summary().starts_with("Route: 1."));
}

#[tokio::test]
async fn test_pause_and_resume() {
    let h = harness(PermissionPolicy::DenyAll, None, Ok(30.0), Ok("Silay"));
    let mut screen = open(ScreenConfig::map(), h.services);

    screen.pause().unwrap();
    assert_eq!(screen.state(), ScreenState::Paused);
    assert_eq!(screen.surface().state(), SurfaceState::Paused);
    assert!(screen.pause().is_err());

    screen.resume().unwrap();
    assert_eq!(screen.state(), ScreenState::Active);
    assert_eq!(screen.surface().state(), SurfaceState::Running);
}

#[tokio::test]
async fn test_teardown_with_fix_in_flight_releases_once() {
    let mut h = harness(PermissionPolicy::GrantAll, None, Ok(30.0), Ok("Silay"));
    h.services.location = Arc::new(FixedLocationProvider::new(SILAY, Duration::from_millis(100)));
    let mut screen = open(ScreenConfig::weather(), h.services);

    // Location is on, the fix is still on its way
    assert!(pump_until(&mut screen, |s| s.is_location_enabled()).await);
    assert_eq!(screen.active_tasks(), 1);

    assert!(screen.destroy());
    assert!(!screen.destroy());
    assert_eq!(screen.active_tasks(), 0);
    assert_eq!(screen.surface().release_count(), 1);
    assert!(screen.surface().overlays().is_empty());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(screen.pump(), 0);
    assert!(screen.weather_reading().is_none());
    assert!(h.calls.lock().unwrap().is_empty());
    assert_eq!(screen.surface().release_count(), 1);
}

#[tokio::test]
async fn test_screen_is_usable_before_layout() {
    let h = harness(PermissionPolicy::GrantAll, Some(SILAY), Ok(30.0), Ok("Silay"));
    let mut screen = ScreenController::new(ScreenConfig::map(), h.services);
    screen.activate().unwrap();
    assert_eq!(screen.state(), ScreenState::Configuring);

    // No permission request until the surface has a size
    settle(&mut screen).await;
    assert!(screen.permission().is_none());
    assert!(screen.destroy());
}

use crate::screen::{
    config::{Destination, ScreenConfig},
    controller::ScreenController,
    services::ScreenServices,
};
use crate::Result;

/// Holds the one active screen and swaps it on navigation.
///
/// Selecting a destination destroys the current screen before the next one
/// is built, so at most one screen owns a map surface and background tasks
/// at any time. Selecting the current destination rebuilds it.
pub struct NavigationShell {
    services: ScreenServices,
    current: Destination,
    screen: ScreenController,
}

impl NavigationShell {
    /// Starts on the plain map screen
    pub fn new(services: ScreenServices) -> Result<Self> {
        Self::starting_at(services, Destination::Map)
    }

    pub fn starting_at(services: ScreenServices, destination: Destination) -> Result<Self> {
        let screen = Self::build(&services, destination)?;
        Ok(Self {
            services,
            current: destination,
            screen,
        })
    }

    fn build(services: &ScreenServices, destination: Destination) -> Result<ScreenController> {
        let mut screen =
            ScreenController::new(ScreenConfig::for_destination(destination), services.clone());
        screen.activate()?;
        Ok(screen)
    }

    /// Tear down the active screen and show `destination`
    pub fn select(&mut self, destination: Destination) -> Result<()> {
        log::info!("switching to the {} screen", destination);
        self.screen.destroy();
        self.screen = Self::build(&self.services, destination)?;
        self.current = destination;
        Ok(())
    }

    pub fn current(&self) -> Destination {
        self.current
    }

    pub fn screen(&self) -> &ScreenController {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut ScreenController {
        &mut self.screen
    }

    /// Tab entries in display order
    pub fn destinations(&self) -> &'static [Destination] {
        &Destination::ALL
    }

    pub fn services(&self) -> &ScreenServices {
        &self.services
    }
}

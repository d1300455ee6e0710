// Loop state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerState {
    /// Integral accumulator `ei`
    pub integral: f64,
    /// Error from the previous step, for the derivative estimate
    pub prev_error: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActuatorState {
    /// Lagged output `u` (pre-deadband, what gets plotted)
    pub output: f64,
    /// Last unlagged command `uCmd`
    pub command: f64,
    /// Output after the deadband, what reaches the plant
    pub effective: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlantState {
    /// Observable output: sled position or flywheel speed
    pub y: f64,
    /// Sled velocity
    pub v: f64,
    /// Flywheel angular speed
    pub omega: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopState {
    pub t: f64,
    pub controller: ControllerState,
    pub actuator: ActuatorState,
    pub plant: PlantState,
}

pub trait Model {
    fn reset(&mut self);
}

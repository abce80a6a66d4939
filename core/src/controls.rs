/// A submit control (a `<button type=submit>` or `<input type=submit>`).
pub trait SubmitControl {
    fn set_disabled(&self, disabled: bool);
    fn set_label(&self, label: &str);
}

/// Disables every control and swaps in `label`. There is no way back within
/// the page load; the form is expected to navigate away.
pub fn guard_submission<C: SubmitControl>(controls: &[C], label: &str) -> usize {
    for control in controls {
        control.set_disabled(true);
        control.set_label(label);
    }
    controls.len()
}

pub trait LiftTarget {
    fn set_transform(&self, transform: &str);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverLift {
    lift_px: f64,
}

impl HoverLift {
    pub const NEUTRAL: &'static str = "translateY(0)";

    pub fn new(lift_px: f64) -> Self {
        let lift_px = if lift_px.is_finite() { lift_px.abs() } else { 0.0 };
        Self { lift_px }
    }

    pub fn raised(&self) -> String {
        format!("translateY(-{}px)", self.lift_px)
    }

    pub fn enter(&self, target: &impl LiftTarget) {
        target.set_transform(&self.raised());
    }

    pub fn leave(&self, target: &impl LiftTarget) {
        target.set_transform(Self::NEUTRAL);
    }
}

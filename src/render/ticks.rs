/// Place roughly `target` axis ticks inside `[min, max]` on a 1/2/5 decade
/// grid.
///
/// Returns an empty vector for degenerate or non-finite ranges; callers simply
/// skip tick labels in that case.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) || max <= min || target == 0 {
        return Vec::new();
    }

    let raw_step = (max - min) / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;
    let step = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    } * magnitude;

    let mut ticks = Vec::new();
    let mut tick = (min / step).ceil() * step;
    // Tolerance absorbs the accumulated rounding of repeated additions.
    let tolerance = step * 1e-9;
    while tick <= max + tolerance {
        // Snap near-zero ticks so labels render "0" rather than "-0".
        ticks.push(if tick.abs() < tolerance { 0.0 } else { tick });
        tick += step;
    }
    ticks
}

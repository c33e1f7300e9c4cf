use std::time::Duration;

/// One plotted sample: displacement on the selected axis at a session time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub timestamp: Duration,
    pub displacement_m: f64,
}

/// Append-only series of trajectory points, for visualization only.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: TrajectoryPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// (min, max) displacement across the series, for axis scaling.
    pub fn displacement_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.points.iter().map(|p| p.displacement_m);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

impl Extend<TrajectoryPoint> for Trajectory {
    fn extend<T: IntoIterator<Item = TrajectoryPoint>>(&mut self, iter: T) {
        self.points.extend(iter);
    }
}

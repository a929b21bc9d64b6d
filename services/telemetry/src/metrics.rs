use crate::animator::ValueAnimator;
use crate::random_walk::{Bounds, RandomWalk};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    DeliverySuccess,
    DailySavings,
    TotalDeliveries,
    CustomerSatisfaction,
    ActiveDrivers,
    AvgDeliveryTime,
}

impl MetricField {
    pub const ALL: [MetricField; 6] = [
        MetricField::DeliverySuccess,
        MetricField::DailySavings,
        MetricField::TotalDeliveries,
        MetricField::CustomerSatisfaction,
        MetricField::ActiveDrivers,
        MetricField::AvgDeliveryTime,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn bounds(self) -> Bounds {
        match self {
            MetricField::DeliverySuccess => Bounds::new(0.0, 99.9),
            MetricField::DailySavings => Bounds::new(0.0, u64::MAX as f64),
            MetricField::TotalDeliveries => Bounds::new(0.0, u64::MAX as f64),
            MetricField::CustomerSatisfaction => Bounds::new(4.5, 5.0),
            MetricField::ActiveDrivers => Bounds::new(140.0, 180.0),
            MetricField::AvgDeliveryTime => Bounds::new(20.0, 30.0),
        }
    }
}

/// Committed metric values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricValues {
    pub delivery_success: f64,
    pub daily_savings: u64,
    pub total_deliveries: u64,
    pub customer_satisfaction: f64,
    pub active_drivers: u32,
    pub avg_delivery_time: f64,
}

impl MetricValues {
    pub fn get(&self, field: MetricField) -> f64 {
        match field {
            MetricField::DeliverySuccess => self.delivery_success,
            MetricField::DailySavings => self.daily_savings as f64,
            MetricField::TotalDeliveries => self.total_deliveries as f64,
            MetricField::CustomerSatisfaction => self.customer_satisfaction,
            MetricField::ActiveDrivers => f64::from(self.active_drivers),
            MetricField::AvgDeliveryTime => self.avg_delivery_time,
        }
    }

    /// Advance every field by its own walk rule.
    pub fn advanced(&self, walk: &mut RandomWalk) -> MetricValues {
        let drivers = MetricField::ActiveDrivers.bounds();
        MetricValues {
            delivery_success: walk.step(self.delivery_success, 0.1, MetricField::DeliverySuccess.bounds()),
            daily_savings: walk.increment(self.daily_savings, 100, u64::MAX),
            total_deliveries: walk.increment(self.total_deliveries, 3, u64::MAX),
            customer_satisfaction: walk.step(
                self.customer_satisfaction,
                0.01,
                MetricField::CustomerSatisfaction.bounds(),
            ),
            active_drivers: walk.step_int(
                i64::from(self.active_drivers),
                1,
                drivers.lower() as i64,
                drivers.upper() as i64,
            ) as u32,
            avg_delivery_time: walk.step(self.avg_delivery_time, 0.5, MetricField::AvgDeliveryTime.bounds()),
        }
    }
}

/// Animated, presentation-facing copy of [`MetricValues`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayedMetrics {
    pub delivery_success: f64,
    pub daily_savings: f64,
    pub total_deliveries: f64,
    pub customer_satisfaction: f64,
    pub active_drivers: f64,
    pub avg_delivery_time: f64,
}

impl DisplayedMetrics {
    fn set(&mut self, field: MetricField, value: f64) {
        match field {
            MetricField::DeliverySuccess => self.delivery_success = value,
            MetricField::DailySavings => self.daily_savings = value,
            MetricField::TotalDeliveries => self.total_deliveries = value,
            MetricField::CustomerSatisfaction => self.customer_satisfaction = value,
            MetricField::ActiveDrivers => self.active_drivers = value,
            MetricField::AvgDeliveryTime => self.avg_delivery_time = value,
        }
    }

    pub fn get(&self, field: MetricField) -> f64 {
        match field {
            MetricField::DeliverySuccess => self.delivery_success,
            MetricField::DailySavings => self.daily_savings,
            MetricField::TotalDeliveries => self.total_deliveries,
            MetricField::CustomerSatisfaction => self.customer_satisfaction,
            MetricField::ActiveDrivers => self.active_drivers,
            MetricField::AvgDeliveryTime => self.avg_delivery_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsView {
    pub committed: MetricValues,
    pub displayed: DisplayedMetrics,
    pub animating: bool,
}

struct MetricState {
    committed: MetricValues,
    animators: [ValueAnimator; 6],
}

/// Holder for the committed metrics and their per-field animators.
pub struct MetricBoard {
    state: Mutex<MetricState>,
}

impl MetricBoard {
    /// Every animator starts at 0 and is aimed at its initial committed value.
    pub fn new(initial: MetricValues, duration: Duration, frame_interval: Duration) -> Self {
        let mut animators: [ValueAnimator; 6] =
            std::array::from_fn(|_| ValueAnimator::new(duration, frame_interval));
        for field in MetricField::ALL {
            animators[field.slot()].retarget(initial.get(field));
        }
        Self {
            state: Mutex::new(MetricState {
                committed: initial,
                animators,
            }),
        }
    }

    pub fn view(&self) -> MetricsView {
        let state = self.state.lock();
        let mut displayed = DisplayedMetrics::default();
        for field in MetricField::ALL {
            displayed.set(field, state.animators[field.slot()].value());
        }
        MetricsView {
            committed: state.committed,
            displayed,
            animating: state.animators.iter().any(ValueAnimator::is_animating),
        }
    }

    pub fn committed(&self) -> MetricValues {
        self.state.lock().committed
    }

    /// Random-walk every field, then retarget each animator at its new value.
    pub fn commit(&self, walk: &mut RandomWalk) -> MetricValues {
        let mut state = self.state.lock();
        let next = state.committed.advanced(walk);
        self.apply_locked(&mut state, next);
        next
    }

    /// Commit explicit values, e.g. from a replay or a test.
    pub fn commit_values(&self, next: MetricValues) {
        let mut state = self.state.lock();
        self.apply_locked(&mut state, next);
    }

    fn apply_locked(&self, state: &mut MetricState, next: MetricValues) {
        state.committed = next;
        for field in MetricField::ALL {
            state.animators[field.slot()].retarget(next.get(field));
        }
    }

    /// Advance every running animator one frame. Returns how many emitted.
    pub fn advance_frame(&self) -> usize {
        let mut state = self.state.lock();
        state
            .animators
            .iter_mut()
            .filter_map(ValueAnimator::advance)
            .count()
    }

    /// Cancel every in-flight animation; displayed values freeze.
    pub fn cancel_animations(&self) {
        let mut state = self.state.lock();
        for animator in state.animators.iter_mut() {
            animator.cancel();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionSet {
    pub eta_accuracy: f64,
    pub risk_prediction: f64,
    pub cost_savings: f64,
    pub delivery_success: f64,
}

impl PredictionSet {
    pub fn eta_accuracy_bounds() -> Bounds {
        Bounds::new(90.0, 99.9)
    }

    pub fn risk_prediction_bounds() -> Bounds {
        Bounds::new(85.0, 99.9)
    }

    pub fn cost_savings_bounds() -> Bounds {
        Bounds::new(2.0, 4.0)
    }

    pub fn delivery_success_bounds() -> Bounds {
        Bounds::new(90.0, 99.9)
    }

    pub fn advanced(&self, walk: &mut RandomWalk) -> PredictionSet {
        PredictionSet {
            eta_accuracy: walk.step(self.eta_accuracy, 0.2, Self::eta_accuracy_bounds()),
            risk_prediction: walk.step(self.risk_prediction, 0.3, Self::risk_prediction_bounds()),
            cost_savings: walk.step(self.cost_savings, 0.1, Self::cost_savings_bounds()),
            delivery_success: walk.step(self.delivery_success, 0.1, Self::delivery_success_bounds()),
        }
    }
}

pub struct PredictionBoard {
    current: Mutex<PredictionSet>,
}

impl PredictionBoard {
    pub fn new(initial: PredictionSet) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    pub fn get(&self) -> PredictionSet {
        *self.current.lock()
    }

    pub fn commit(&self, walk: &mut RandomWalk) -> PredictionSet {
        let mut current = self.current.lock();
        *current = current.advanced(walk);
        *current
    }
}

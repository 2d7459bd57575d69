use serde::{Deserialize, Serialize};

/// Facial expressions recognized by the avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    Neutral,
    Angry,
    Happy,
    Sad,
    Relaxed,
    Surprised,
    Blink,
    /// Model-specific extra expression.
    Extra,
}

impl Expression {
    pub const ALL: [Expression; 8] = [
        Expression::Neutral,
        Expression::Angry,
        Expression::Happy,
        Expression::Sad,
        Expression::Relaxed,
        Expression::Surprised,
        Expression::Blink,
        Expression::Extra,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Expression::Neutral => "neutral",
            Expression::Angry => "angry",
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Relaxed => "relaxed",
            Expression::Surprised => "surprised",
            Expression::Blink => "blink",
            Expression::Extra => "extra",
        }
    }

    /// Parses an expression name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Expression> {
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(name))
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// Receiver of per-frame expression weights (a morph/blend-shape manager).
pub trait ExpressionSink {
    /// Sets the weight of a named expression. Unknown names are ignored.
    fn set(&mut self, name: &str, weight: f32);
}

/// Weights of every recognized expression, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpressionWeights {
    weights: [f32; Expression::ALL.len()],
}

impl ExpressionWeights {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, expression: Expression) -> f32 {
        self.weights[expression.index()]
    }

    /// Sets a weight, clamped to `[0, 1]`. NaN is stored as 0.
    pub fn set_weight(&mut self, expression: Expression, weight: f32) {
        self.weights[expression.index()] = if weight.is_nan() {
            0.0
        } else {
            weight.clamp(0.0, 1.0)
        };
    }

    #[must_use]
    pub fn with(mut self, expression: Expression, weight: f32) -> Self {
        self.set_weight(expression, weight);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Expression, f32)> + '_ {
        Expression::ALL.into_iter().map(|e| (e, self.get(e)))
    }

    /// Pushes every weight into `sink`.
    pub fn apply_to(&self, sink: &mut impl ExpressionSink) {
        for (expression, weight) in self.iter() {
            sink.set(expression.name(), weight);
        }
    }
}

impl ExpressionSink for ExpressionWeights {
    fn set(&mut self, name: &str, weight: f32) {
        match Expression::from_name(name) {
            Some(expression) => self.set_weight(expression, weight),
            None => log::trace!("Ignoring unknown expression '{name}'"),
        }
    }
}

//! Draw recording, replay, and antithetic mirroring.
//!
//! A [`RecordingRng`] wraps a live [`PlanRng`] and captures every typed draw
//! into per-type tapes. A [`ReplayRng`] re-emits a tape either verbatim or
//! mirrored (`1-u` for uniforms, `-z` for symmetric variates), which is the
//! antithetic half of a variance-reduced realization pair.

use super::stream::{PlanRng, RandomSource};

/// Per-type tapes of recorded draws.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawTapes {
    /// Recorded uniform draws.
    pub uniforms: Vec<f64>,
    /// Recorded standard normal draws.
    pub normals: Vec<f64>,
    /// Recorded Student-t draws.
    pub student_ts: Vec<f64>,
    /// Recorded exponential draws.
    pub exponentials: Vec<f64>,
    /// Recorded Poisson draws.
    pub poissons: Vec<u64>,
}

impl DrawTapes {
    /// Total number of recorded draws across all types.
    pub fn len(&self) -> usize {
        self.uniforms.len()
            + self.normals.len()
            + self.student_ts.len()
            + self.exponentials.len()
            + self.poissons.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Recording wrapper: draws from the inner stream and tapes every value.
pub struct RecordingRng {
    inner: PlanRng,
    tapes: DrawTapes,
}

impl RecordingRng {
    /// Wraps a live generator.
    pub fn new(inner: PlanRng) -> Self {
        Self {
            inner,
            tapes: DrawTapes::default(),
        }
    }

    /// Read access to the tapes recorded so far.
    pub fn tapes(&self) -> &DrawTapes {
        &self.tapes
    }

    /// Consumes the recorder, yielding the tapes.
    pub fn into_tapes(self) -> DrawTapes {
        self.tapes
    }
}

impl RandomSource for RecordingRng {
    fn next_uniform(&mut self) -> f64 {
        let u = self.inner.next_uniform();
        self.tapes.uniforms.push(u);
        u
    }

    fn normal(&mut self) -> f64 {
        let z = self.inner.normal();
        self.tapes.normals.push(z);
        z
    }

    fn student_t(&mut self, df: f64) -> f64 {
        let t = self.inner.student_t(df);
        self.tapes.student_ts.push(t);
        t
    }

    fn exponential(&mut self, lambda: f64) -> f64 {
        let x = self.inner.exponential(lambda);
        self.tapes.exponentials.push(x);
        x
    }

    fn poisson(&mut self, lambda: f64) -> u64 {
        let k = self.inner.poisson(lambda);
        self.tapes.poissons.push(k);
        k
    }
}

/// Mirroring mode for replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mirror {
    /// Re-emit every draw exactly as recorded.
    #[default]
    Verbatim,
    /// Antithetic mirror: uniforms become `1 - u`, symmetric variates
    /// (normal, Student-t) become their negation. Exponential and Poisson
    /// draws have no symmetric mirror and replay verbatim.
    Antithetic,
}

/// Replay wrapper: re-emits previously recorded tapes.
///
/// # Panics
///
/// Each typed method panics if its tape is exhausted; replaying more draws
/// than were recorded means the replayed realization diverged from the
/// recorded one, which is a programming error.
pub struct ReplayRng {
    tapes: DrawTapes,
    mirror: Mirror,
    uniform_pos: usize,
    normal_pos: usize,
    student_t_pos: usize,
    exponential_pos: usize,
    poisson_pos: usize,
}

impl ReplayRng {
    /// Creates a replay source over recorded tapes.
    pub fn new(tapes: DrawTapes, mirror: Mirror) -> Self {
        Self {
            tapes,
            mirror,
            uniform_pos: 0,
            normal_pos: 0,
            student_t_pos: 0,
            exponential_pos: 0,
            poisson_pos: 0,
        }
    }

    /// The active mirroring mode.
    pub fn mirror(&self) -> Mirror {
        self.mirror
    }
}

impl RandomSource for ReplayRng {
    fn next_uniform(&mut self) -> f64 {
        let u = self.tapes.uniforms[self.uniform_pos];
        self.uniform_pos += 1;
        match self.mirror {
            Mirror::Verbatim => u,
            Mirror::Antithetic => 1.0 - u,
        }
    }

    fn normal(&mut self) -> f64 {
        let z = self.tapes.normals[self.normal_pos];
        self.normal_pos += 1;
        match self.mirror {
            Mirror::Verbatim => z,
            Mirror::Antithetic => -z,
        }
    }

    fn student_t(&mut self, _df: f64) -> f64 {
        let t = self.tapes.student_ts[self.student_t_pos];
        self.student_t_pos += 1;
        match self.mirror {
            Mirror::Verbatim => t,
            Mirror::Antithetic => -t,
        }
    }

    fn exponential(&mut self, _lambda: f64) -> f64 {
        let x = self.tapes.exponentials[self.exponential_pos];
        self.exponential_pos += 1;
        x
    }

    fn poisson(&mut self, _lambda: f64) -> u64 {
        let k = self.tapes.poissons[self.poisson_pos];
        self.poisson_pos += 1;
        k
    }
}

use super::relu;

/// The activation functions a layer can apply to its output.
#[derive(Clone, Copy, Debug)]
pub enum ActFn {
    Relu(relu::Relu),
}

impl ActFn {
    pub fn relu() -> Self {
        Self::Relu(relu::Relu::new())
    }

    pub fn f(&self, x: f32) -> f32 {
        match self {
            Self::Relu(a) => a.f(x),
        }
    }

    pub fn df(&self, x: f32) -> f32 {
        match self {
            Self::Relu(a) => a.df(x),
        }
    }
}

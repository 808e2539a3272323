use super::Relu;

#[derive(Clone, Debug)]
pub enum ActFn {
    Relu(Relu),
}

impl ActFn {
    pub fn relu() -> Self {
        Self::Relu(Relu)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_clamps_negatives() {
        let relu = ActFn::relu();
        assert_eq!(relu.f(-3.0), 0.0);
        assert_eq!(relu.f(2.5), 2.5);
        assert_eq!(relu.df(-1.0), 0.0);
        assert_eq!(relu.df(1.0), 1.0);
    }
}

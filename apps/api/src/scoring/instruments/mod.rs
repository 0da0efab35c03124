//! Built-in questionnaire definitions. Each file is data only; scoring lives in `engine.rs`.

mod climate;
mod harassment;
mod quality_of_life;
mod stress;

pub use climate::workplace_climate;
pub use harassment::harassment_perception;
pub use quality_of_life::quality_of_work_life;
pub use stress::occupational_stress;

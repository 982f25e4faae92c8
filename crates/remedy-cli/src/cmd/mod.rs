pub mod decode;
pub mod score;
pub mod serve;

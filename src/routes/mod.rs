pub mod outfit;

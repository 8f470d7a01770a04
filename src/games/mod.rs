pub mod halfcourt;

pub mod axis;

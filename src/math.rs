pub mod lvr;

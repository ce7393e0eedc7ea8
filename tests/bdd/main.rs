mod lib;

mod parallel;
mod spec_suite;
mod world;

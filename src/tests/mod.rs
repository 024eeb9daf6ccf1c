mod isolation_tests;
mod scenario_tests;
mod threshold_tests;

mod check_tests;
mod common;
mod generate_tests;
mod lua_tests;

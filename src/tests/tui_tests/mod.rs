// TUI Tests Module - Testing the public tui module
// - app_tests: App state transitions over a fake backend
// - screens_tests: contact list and chat view screen state
// - ui_tests: helpers and rendering into a test terminal

mod app_tests;
mod screens_tests;
mod ui_tests;

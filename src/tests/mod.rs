// Test modules for TomeSphere DM
// Each module tests the corresponding source module; `fake` provides a
// scriptable backend for the view and TUI tests.


mod tui_tests;

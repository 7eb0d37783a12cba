mod editor_tests;

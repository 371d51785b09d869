pub mod extensions_tests;

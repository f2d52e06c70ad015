mod automata_test;
mod matcher_test;
mod syntax_test;

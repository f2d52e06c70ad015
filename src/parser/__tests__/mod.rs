mod expr_test;

mod calc_test;

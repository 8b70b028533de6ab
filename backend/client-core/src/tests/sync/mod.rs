mod synchronizer;

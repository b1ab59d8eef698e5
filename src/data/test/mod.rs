mod state_store;

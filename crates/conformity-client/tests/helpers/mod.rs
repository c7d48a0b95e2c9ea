pub mod mock_conformity_server;

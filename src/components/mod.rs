pub mod gene_network;

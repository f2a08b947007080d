//! Contract interfaces read by the adapter.

use alloy::sol;

sol! {
    /// Velodrome spot price oracle.
    interface IVeloOracle {
        function getManyRatesWithConnectors(uint8 src_len, address[] memory connectors)
            external
            view
            returns (uint256[] memory rates);
    }

    /// ITP staking vault. The first field of `getVaultInfo` is the total amount staked.
    interface IInfiniteVault {
        function getVaultInfo()
            external
            view
            returns (uint256, uint256, uint256, uint256, uint256, uint256[] memory, uint256);
    }

    interface IAutoCompounder {
        function balance() external view returns (uint256);
    }

    interface IVelodromePool {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function getReserves()
            external
            view
            returns (uint256 reserve0, uint256 reserve1, uint256 block_timestamp_last);
        function totalSupply() external view returns (uint256);
    }

    interface IERC20Metadata {
        function decimals() external view returns (uint8);
    }

    interface IMulticall3 {
        struct Call3 {
            address target;
            bool allow_failure;
            bytes call_data;
        }

        struct Call3Result {
            bool success;
            bytes return_data;
        }

        function aggregate3(Call3[] calldata calls)
            external
            payable
            returns (Call3Result[] memory return_data);
    }
}
